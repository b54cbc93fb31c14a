mod modem;
